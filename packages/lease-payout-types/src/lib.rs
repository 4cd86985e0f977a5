pub mod block;
pub mod transaction;
pub mod transfer;

/// Prefix of a recipient expressed as an alias: `alias:<chain>:<name>`.
pub const ALIAS_PREFIX: &str = "alias:";

pub mod prelude {
    pub use crate::block::*;
    pub use crate::transaction::*;
    pub use crate::transfer::*;
    pub use crate::{alias_name, ALIAS_PREFIX};
}

/// Return the alias name of a recipient written as `alias:<chain>:<name>`,
/// or `None` if the recipient is a plain address.
pub fn alias_name(recipient: &str) -> Option<&str> {
    let rest = recipient.strip_prefix(ALIAS_PREFIX)?;
    let (_chain, name) = rest.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_name() {
        assert_eq!(alias_name("alias:W:mynode"), Some("mynode"));
        assert_eq!(alias_name("3PAddress"), None);
        assert_eq!(alias_name("alias:W:"), None);
        assert_eq!(alias_name("alias:nochain"), None);
    }
}
