use std::fmt;

/// Role of an individual within the sequenced trio.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum FamilyMember {
    Father,
    Mother,
    Child,
}

impl FamilyMember {
    pub const ALL: [FamilyMember; 3] = [
        FamilyMember::Father,
        FamilyMember::Mother,
        FamilyMember::Child,
    ];
}

impl fmt::Display for FamilyMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FamilyMember::Father => "father",
            FamilyMember::Mother => "mother",
            FamilyMember::Child => "child",
        };
        write!(f, "{}", label)
    }
}
