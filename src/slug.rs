//! Filesystem- and git-safe identifiers derived from names
//!
//! A slug is the only identifier used as a git linked-worktree name and as a
//! path component. Branch names such as `feat/x` map to `feat-x`.

/// Maximum length of a slug in bytes (slugs are pure ASCII).
pub const MAX_SLUG_LENGTH: usize = 64;

/// Derive the slug of `name`.
///
/// Lowercases ASCII letters, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, strips leading/trailing `-` and bounds the
/// length to [`MAX_SLUG_LENGTH`]. `slugify(slugify(n)) == slugify(n)`.
///
/// Returns an empty string when `name` has no ASCII alphanumerics.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len().min(MAX_SLUG_LENGTH));
    let mut pending_dash = false;

    for c in name.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Returns true if `s` is already in slug form.
pub fn is_slug(s: &str) -> bool {
    !s.is_empty() && slugify(s) == s
}
