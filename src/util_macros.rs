
// Quick little util for stringly enums.
macro_rules! string_enum {
    (
        $(#[$($Enum_attr:tt)+])*
        $vis:vis enum $Enum:ident {
            $(
                $(#[$($variant_attr:tt)+])* $Variant:ident,
            )*
        }
    ) => {
        $(#[$($Enum_attr)+])*
        #[derive(strum::Display, strum::EnumString)]
        $vis enum $Enum {
            $( $(#[$($variant_attr)+])* $Variant, )*
        }
    }
}

// =============================================================================

#[macro_export]
macro_rules! _diagnostic {
    ( // shorthand for message only
        @ $severity:ident,
        $message_fmt:literal $(, $message_arg:expr)* $(,)?
    ) => { $crate::_diagnostic!{
        @ $severity,
        message($message_fmt $(, $message_arg)*),
    }};

    ( @ $severity:ident, $($rest:tt)+ ) => {{
        let mut d = $crate::diagnostic::Diagnostic::$severity();
        $crate::_diagnostic_muncher!( [&mut d], $($rest)+ );
        d
    }};
}

#[macro_export]
macro_rules! _diagnostic_muncher {
    ( [$d:expr] ) => { $d };
    ( [$d:expr], ) => { $d };
    ( [$d:expr], code=$code:literal $($rest:tt)* ) => { $crate::_diagnostic_muncher!{
        [$d.code($code.to_string())] $($rest)*
    }};
    ( [$d:expr], message( $($msg:tt)+ ) $($rest:tt)* ) => { $crate::_diagnostic_muncher!{
        [$d.message(format!($($msg)+))] $($rest)*
    }};
    ( [$d:expr], primary( $span:expr, $($msg:tt)+ ) $($rest:tt)* ) => { $crate::_diagnostic_muncher!{
        [$d.primary(&$span, format!($($msg)+))] $($rest)*
    }};
    ( [$d:expr], secondary( $span:expr, $($msg:tt)+ ) $($rest:tt)* ) => { $crate::_diagnostic_muncher!{
        [$d.secondary(&$span, format!($($msg)+))] $($rest)*
    }};
    ( [$d:expr], note( $($msg:tt)+ ) $($rest:tt)* ) => { $crate::_diagnostic_muncher!{
        [$d.note(format!($($msg)+))] $($rest)*
    }};
}

/// Generates a [`crate::diagnostic::Diagnostic`] of severity `bug`.
#[macro_export]
macro_rules! bug {
    ($($arg:tt)+) => { $crate::_diagnostic!(@bug, $($arg)+) };
}

/// Generates a [`crate::diagnostic::Diagnostic`] of severity `error`.
///
/// See `error_macro_examples` near its definition for an example of usage.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::_diagnostic!(@error, $($arg)+) };
}

/// Generates a [`crate::diagnostic::Diagnostic`] of severity `warning`.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => { $crate::_diagnostic!(@warning, $($arg)+) };
}

#[test]
fn error_macro_examples() {
    let ctx = crate::context::CompilerContext::new_captured();
    let span = crate::pos::Span::NULL;

    // Shorthand form: Just the message
    ctx.diagnostics.emit(error!("lmao {}", 20 + 3)).ignore();

    // Long form: any parts can be mixed and matched in any order
    ctx.diagnostics.emit(error!(
        code="E_UNSUPPORTED",
        message("lmao {}", 20 + 3),
        // labels.  First arg is a span, rest is format args.
        primary(span, "{} is silly", 1),
        note("you can have multiple parts, what about it"),
    )).ignore();

    let captured = ctx.get_captured_diagnostics().unwrap();
    assert!(captured.contains("lmao 23"));
    assert!(captured.contains("E_UNSUPPORTED"));
}
