//! Deterministic key synthesis for groups and fields declared without one.

use sha2::{Digest, Sha256};

/// Hex digits of the content hash appended to synthesized keys.
const HASH_LEN: usize = 8;

/// Lower-case, runs of non-alphanumerics collapsed to `_`, trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

pub fn short_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(HASH_LEN);
    hex
}

/// `group_<slug>_<hash>`; the slug part is dropped when empty.
pub fn synthesize_group_key(title: &str, content: &str) -> String {
    join_key("group", &slugify(title), &short_hash(content))
}

/// `field_<slug>_<hash>`, hashed over the parent scope and position.
pub fn synthesize_field_key(parent_key: &str, index: usize, name: &str) -> String {
    let scope = format!("{}/{}/{}", parent_key, index, name);
    join_key("field", &slugify(name), &short_hash(&scope))
}

fn join_key(prefix: &str, slug: &str, hash: &str) -> String {
    if slug.is_empty() {
        format!("{}_{}", prefix, hash)
    } else {
        format!("{}_{}_{}", prefix, slug, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Contact Info"), "contact_info");
        assert_eq!(slugify("  Hero -- Banner!! "), "hero_banner");
        assert_eq!(slugify("Über Uns"), "ber_uns");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_short_hash_is_stable() {
        assert_eq!(short_hash("abc"), "ba7816bf");
        assert_eq!(short_hash("abc").len(), HASH_LEN);
    }

    #[test]
    fn test_synthesize_group_key() {
        let key = synthesize_group_key("Contact Info", "content");
        assert!(key.starts_with("group_contact_info_"));
        assert_eq!(key.len(), "group_contact_info_".len() + HASH_LEN);
    }

    #[test]
    fn test_synthesize_group_key_empty_slug() {
        let key = synthesize_group_key("!!!", "content");
        assert!(key.starts_with("group_"));
        assert_eq!(key.len(), "group_".len() + HASH_LEN);
    }

    #[test]
    fn test_field_key_scoped_to_parent() {
        let a = synthesize_field_key("group_a", 0, "email");
        let b = synthesize_field_key("group_b", 0, "email");
        assert!(a.starts_with("field_email_"));
        assert_ne!(a, b);
        assert_eq!(a, synthesize_field_key("group_a", 0, "email"));
    }
}
