//! Visibility levels
//!
//! Every resource and principal carries one of three visibility levels. The
//! levels are totally ordered from most to least restrictive:
//! `private` < `loggedin` < `public`.

use serde::{Deserialize, Serialize};

/// Visibility of a resource, principal, or library bucket.
///
/// The derived ordering follows restrictiveness, so `Private` compares lowest.
///
/// # Examples
///
/// ```
/// use platform_org::Visibility;
///
/// assert!(Visibility::Private < Visibility::LoggedIn);
/// assert!(Visibility::LoggedIn < Visibility::Public);
/// assert_eq!(Visibility::parse("loggedin"), Some(Visibility::LoggedIn));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible only to explicit members and managers
    Private = 0,

    /// Visible to users authenticated on the owning tenant
    LoggedIn = 1,

    /// Visible to everyone, including anonymous users
    Public = 2,
}

impl Visibility {
    /// All visibility levels, most restrictive first.
    pub fn all() -> [Visibility; 3] {
        [Self::Private, Self::LoggedIn, Self::Public]
    }

    /// Parse visibility from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "private" => Some(Self::Private),
            "loggedin" => Some(Self::LoggedIn),
            "public" => Some(Self::Public),
            _ => None,
        }
    }

    /// Get string representation of the visibility.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::LoggedIn => "loggedin",
            Self::Public => "public",
        }
    }

    /// The library buckets readable by a viewer entitled to this bucket.
    ///
    /// Access to a bucket implies access to every less restrictive bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_org::Visibility;
    ///
    /// assert_eq!(
    ///     Visibility::LoggedIn.visible_buckets(),
    ///     vec![Visibility::LoggedIn, Visibility::Public]
    /// );
    /// ```
    pub fn visible_buckets(&self) -> Vec<Visibility> {
        Self::all().into_iter().filter(|v| v >= self).collect()
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Public
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
