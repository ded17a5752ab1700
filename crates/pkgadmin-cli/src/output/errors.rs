//! Error reports with actionable suggestions.

use std::error::Error;

use pkgadmin_core::AdminError;

use super::colors::ColorSupport;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    #[cfg(test)]
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error returned by a command.
    ///
    /// Admin errors get their suggestion; every error gets its cause chain.
    pub fn format_report(&self, error: &anyhow::Error) -> String {
        let top = error.chain().next().and_then(|e| e.downcast_ref::<AdminError>());
        if let Some(admin) = top {
            return self.format_error(admin);
        }

        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        let suggestion = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<AdminError>())
            .and_then(AdminError::suggestion);
        if let Some(suggestion) = suggestion {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        for cause in error.chain().skip(1) {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&cause.to_string());
        }

        output
    }

    /// Format an admin error on its own
    pub fn format_error(&self, error: &AdminError) -> String {
        let mut output = format!("{}: {}\n", self.colors.red("error"), error);

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("\n{}: {}\n", self.colors.dim("help"), suggestion));
        }

        let mut source = error.source();
        while let Some(cause) = source {
            output.push_str(&format!("\n{}: {}", self.colors.dim("caused by"), cause));
            source = cause.source();
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
