use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    /// The program was called incorrectly, or with options that cannot work
    UsageError(String),

    /// The input file is missing, unreadable as ODIM data, or holds data that cannot be converted
    InputError(String),

    /// A problem with the system, such as an output file that cannot be created
    RuntimeError(String),

    /// A problem with the converter itself
    InternalError(String),
}

impl CliError {
    pub(crate) fn usage_error<S: ToString>(msg: S) -> Self {
        Self::UsageError(msg.to_string())
    }

    pub(crate) fn input_error<S: ToString>(msg: S) -> Self {
        Self::InputError(msg.to_string())
    }

    pub(crate) fn runtime_error<S: ToString>(msg: S) -> Self {
        Self::RuntimeError(msg.to_string())
    }

    pub(crate) fn internal_error<S: ToString>(msg: S) -> Self {
        Self::InternalError(msg.to_string())
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (type_str, err_msg, fix_msg) = match self {
            CliError::UsageError(msg) => {
                let fix = "Check the command line and configuration file; run with --help for the accepted options.";
                ("Usage error", msg, fix)
            },
            CliError::InputError(msg) => {
                let fix = "Check that the input is an ODIM_H5 file of a supported object type. Running with -vv prints every attribute that was read.";
                ("Input error", msg, fix)
            },
            CliError::RuntimeError(msg) => {
                let fix = "Check that the output location exists and is writable.";
                ("Runtime error", msg, fix)
            },
            CliError::InternalError(msg) => {
                let fix = "This is a bug in odim2grid. Please report it together with the input file that triggered it.";
                ("Internal error", msg, fix)
            },
        };

        writeln!(f, "{type_str}: {err_msg}\n\n{fix_msg}")
    }
}
