/// Knobs for [`Workbook::open_with`](super::Workbook::open_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Reject paths that do not end in `.xlsx` or `.xlsm`.
    pub validate_extension: bool,
    /// Create the shared string part (and its registrations) while opening
    /// when the package lacks one. When off, this happens on the first upload.
    pub provision_shared_strings: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::eager()
    }
}

impl OpenOptions {
    /// Validate the extension and provision shared strings at open.
    pub fn eager() -> Self {
        Self {
            validate_extension: true,
            provision_shared_strings: true,
        }
    }

    /// Leave the package untouched until the first write.
    pub fn deferred() -> Self {
        Self {
            provision_shared_strings: false,
            ..Self::eager()
        }
    }

    #[must_use]
    pub fn with_extension_check(mut self, enabled: bool) -> Self {
        self.validate_extension = enabled;
        self
    }
}
