use crate::{
    ir::text::TextBuilder,
    lower, parser,
    token::Spanned,
    util::{
        self,
        fmt::{tree, Show},
        intern::Interner,
    },
};

pub fn format_error<E>(i: &Interner, e: &Spanned<E>) -> String
where
    Spanned<E>: Show,
{
    let ctx = util::fmt::Context { idents: i };
    format!("{:#}", e.display(&ctx))
}

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    ParserExpr(&'static str),
    LowerProgram(&'static str),
}

pub enum Assertion {
    /// Also used for the printed IR module.
    TreeOk(&'static str),
    ExpectedError(&'static str),
}

#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Option<String>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let idents = &mut Interner::with_capacity(128);

    match test {
        Test::ParserProgram(input) => match parser::parse_program(input, idents) {
            Ok(program) => (tree::print_program_string(idents, &program), None),
            Err(error) => (String::new(), Some(format_error(idents, &error))),
        },
        Test::ParserExpr(input) => match parser::parse_expr(input, idents) {
            Ok(expr) => (tree::print_expr_string(idents, &expr), None),
            Err(error) => (String::new(), Some(format_error(idents, &error))),
        },
        Test::LowerProgram(input) => {
            let program = match parser::parse_program(input, idents) {
                Ok(program) => program,
                Err(error) => return (String::new(), Some(format_error(idents, &error))),
            };
            let mut builder = TextBuilder::new("test");
            if let Err(error) = lower::lower_program(&mut builder, idents, &program) {
                return (String::new(), Some(error.to_string()));
            }
            let module = builder.finish();
            if let Err(error) = module.verify() {
                return (module.to_string(), Some(error.to_string()));
            }
            (module.to_string(), None)
        }
    }
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_tree: &str,
    formatted_actual_error: &Option<String>,
) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            ::pretty_assertions::assert_eq!(formatted_actual_error, &None);
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedError(expected_error) => {
            ::pretty_assertions::assert_eq!(formatted_actual_error.as_deref(), Some(expected_error));
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_tree, formatted_actual_error) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_tree, &formatted_actual_error);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, ir_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_error, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedError($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(parser, expr), $source:expr) => {
        crate::util::test_utils::Test::ParserExpr($source)
    };
    (@@get_test(lower, program), $source:expr) => {
        crate::util::test_utils::Test::LowerProgram($source)
    };
}
pub(crate) use tree_tests;
