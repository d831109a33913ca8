//! The capability every concrete pass variant provides.
//!
//! Variants (wallet `.pkpass`, `.espass`, ...) read their fields through a
//! [`PassDataExtractor`](crate::PassDataExtractor) and expose them through
//! [`DigitalPass`]. The rest of the application only talks to the trait.

use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::date::Date;

/// A pass the application can list, display and expire.
pub trait DigitalPass {
    /// Short human-readable summary.
    fn description(&self) -> String;

    /// Color the pass is drawn on.
    fn background_color(&self) -> Color;

    /// When the pass stops being valid. Undefined means never.
    fn expiration_date(&self) -> Date;

    /// Whether the issuer cancelled the pass.
    fn voided(&self) -> bool;

    /// Lower-case tag naming the variant, e.g. `"pkpass"`.
    fn format(&self) -> &'static str;

    /// File the pass was loaded from, once known.
    fn path(&self) -> Option<&Path>;

    /// Record the file the pass was loaded from.
    fn set_path(&mut self, path: PathBuf);

    /// Whether the pass is voided or past its expiration date.
    fn has_expired(&self) -> bool {
        self.has_expired_at(&Date::now())
    }

    /// [`has_expired`](Self::has_expired) evaluated at `now`.
    fn has_expired_at(&self, now: &Date) -> bool {
        let expiration = self.expiration_date();
        (!expiration.is_undefined() && *now > expiration) || self.voided()
    }
}

/// Storage for [`DigitalPass::path`] that variants can embed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassPath(Option<PathBuf>);

impl PassPath {
    /// The stored path.
    #[must_use]
    pub fn get(&self) -> Option<&Path> {
        self.0.as_deref()
    }

    /// Replace the stored path.
    pub fn set(&mut self, path: PathBuf) {
        self.0 = Some(path);
    }
}
