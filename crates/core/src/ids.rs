#![forbid(unsafe_code)]

macro_rules! positive_id {
    ($name:ident, $field:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i64);

        impl $name {
            pub fn try_new(value: i64) -> Result<Self, IdError> {
                if value <= 0 {
                    return Err(IdError::NotPositive { field: $field });
                }
                Ok(Self(value))
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(ItemId, "item_id");
positive_id!(TagId, "tag_id");
positive_id!(UserId, "user_id");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdError {
    NotPositive { field: &'static str },
}

impl IdError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::NotPositive { field } => field,
        }
    }

    pub fn message(&self) -> String {
        format!("{} must be a positive integer", self.field())
    }
}
