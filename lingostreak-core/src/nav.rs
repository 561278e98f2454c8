//! Mobile navigation drawer state.
use crate::routes::normalize_path;

/// Open/closed flag for the mobile menu, closed again whenever the resolved
/// path changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MobileNav {
    open: bool,
    path: String,
}

impl MobileNav {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            open: false,
            path: normalize_path(path).to_string(),
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            open: !self.open,
            path: self.path.clone(),
        }
    }

    #[must_use]
    pub fn closed(&self) -> Self {
        Self {
            open: false,
            path: self.path.clone(),
        }
    }

    /// Record the current path; returns the next state when it differs.
    #[must_use]
    pub fn observe_path(&self, path: &str) -> Option<Self> {
        let path = normalize_path(path);
        if path == self.path {
            return None;
        }
        Some(Self {
            open: false,
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_change_closes_menu() {
        let nav = MobileNav::new("/dashboard").toggled();
        assert!(nav.is_open());
        assert!(nav.observe_path("/dashboard/").is_none());
        let moved = nav.observe_path("/feed").unwrap();
        assert!(!moved.is_open());
        assert_eq!(moved.path(), "/feed");
        assert!(!nav.closed().is_open());
    }
}
