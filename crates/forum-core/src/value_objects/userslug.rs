//! Userslug derivation
//!
//! The slug is the URL-safe secondary key of a user. It is computed once from the
//! username at creation time and is what uniqueness of usernames is checked against,
//! so `Alice` and `alice` collide.

/// Derive the userslug for a username.
///
/// Trims, lower-cases, drops everything that is not a letter, digit, whitespace, `-` or
/// `_`, turns whitespace runs into a single `-`, collapses repeated dashes and strips
/// leading/trailing dashes. The result may be empty.
pub fn slugify(username: &str) -> String {
    let mut slug = String::with_capacity(username.len());
    let mut pending_dash = false;

    for c in username.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        }
    }

    slug
}
