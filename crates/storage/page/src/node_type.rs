use std::convert::TryFrom;

/// Classification of a page within a table or index structure.
///
/// The header layout reserves room for internal nodes so the single-leaf
/// layout can grow into a tree without a format change; only leaf pages are
/// produced today.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Slotted leaf page holding cells.
    Leaf = 0,
    /// Interior tree page. Reserved, never written.
    Internal = 1,
}

impl From<NodeType> for u8 {
    fn from(n: NodeType) -> Self {
        n as u8
    }
}

impl TryFrom<u8> for NodeType {
    type Error = ();

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(NodeType::Leaf),
            1 => Ok(NodeType::Internal),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_from_u8() {
        assert_eq!(u8::from(NodeType::Leaf), 0);
        assert_eq!(u8::from(NodeType::Internal), 1);

        assert_eq!(NodeType::try_from(0).unwrap(), NodeType::Leaf);
        assert_eq!(NodeType::try_from(1).unwrap(), NodeType::Internal);

        assert!(NodeType::try_from(7).is_err());
    }
}
