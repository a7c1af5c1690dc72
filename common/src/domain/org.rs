use crate::error::{ReportError, Result};
use bson::{spec::BinarySubtype, Binary, Bson};
use uuid::Uuid;

pub fn parse_org_id(input: &str) -> Result<Uuid> {
    Uuid::parse_str(input).map_err(|source| ReportError::InvalidIdentifier {
        input: input.to_string(),
        source,
    })
}

/// Standard (subtype 4) binary form used for `org_id` and `organizations.id`.
pub fn uuid_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.as_bytes().to_vec(),
    }
}

/// Reads a UUID back out of a binary value. Legacy subtype 3 is accepted too.
pub fn uuid_from_bson(value: &Bson) -> Option<Uuid> {
    match value {
        Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid | BinarySubtype::UuidOld,
            bytes,
        }) => Uuid::from_slice(bytes).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORG: &str = "006de98a-131c-4847-92a9-3150033d6a35";

    #[test]
    fn parse_org_id_accepts_hyphenated_uuid() {
        let id = parse_org_id(ORG).unwrap();
        assert_eq!(id.to_string(), ORG);
    }

    #[test]
    fn parse_org_id_rejects_garbage() {
        let err = parse_org_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, ReportError::InvalidIdentifier { ref input, .. } if input == "not-a-uuid"));
    }

    #[test]
    fn parse_org_id_rejects_empty_input() {
        assert!(parse_org_id("").is_err());
    }

    #[test]
    fn uuid_binary_uses_standard_subtype() {
        let id = parse_org_id(ORG).unwrap();
        let bin = uuid_binary(id);
        assert_eq!(bin.subtype, BinarySubtype::Uuid);
        assert_eq!(bin.bytes, id.as_bytes().to_vec());
        assert_eq!(uuid_from_bson(&Bson::Binary(bin)), Some(id));
    }

    #[test]
    fn uuid_from_bson_rejects_other_shapes() {
        assert_eq!(uuid_from_bson(&Bson::String(ORG.to_string())), None);

        let generic = Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![0; 16],
        });
        assert_eq!(uuid_from_bson(&generic), None);

        let short = Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: vec![1, 2, 3],
        });
        assert_eq!(uuid_from_bson(&short), None);
    }
}
