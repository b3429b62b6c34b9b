//! [`Record`]: a key/values pair plus a match flag, returned by
//! [`crate::Collection::get`].

use crate::error::CollectionError;
use crate::field::{Field, FieldValue};

/// The result of looking up a key: either the matching leaf's key and
/// encoded values, or a non-matching placeholder carrying the queried key.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    matched: bool,
    key: Vec<u8>,
    values: Vec<Vec<u8>>,
}

impl Record {
    pub(crate) fn matched(key: Vec<u8>, values: Vec<Vec<u8>>) -> Record {
        Record {
            matched: true,
            key,
            values,
        }
    }

    pub(crate) fn mismatched(key: Vec<u8>) -> Record {
        Record {
            matched: false,
            key,
            values: Vec::new(),
        }
    }

    /// Whether a record with this exact key exists in the tree.
    pub fn matches(&self) -> bool {
        self.matched
    }

    /// The queried key, whether or not it matched.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The record's decoded values.
    ///
    /// Errors with [`CollectionError::NoMatchFound`] if the record didn't
    /// match, or [`CollectionError::WrongNumberOfValues`] if the stored
    /// values don't decode against the given field kinds.
    pub fn values(&self, fields: &[Box<dyn Field>]) -> Result<Vec<FieldValue>, CollectionError> {
        if !self.matched {
            return Err(CollectionError::NoMatchFound);
        }

        if self.values.len() != fields.len() {
            return Err(CollectionError::WrongNumberOfValues);
        }

        self.values
            .iter()
            .zip(fields.iter())
            .map(|(raw, field)| {
                field
                    .decode(raw)
                    .map_err(|_| CollectionError::WrongNumberOfValues)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Data, Stake64};

    #[test]
    fn mismatch_yields_error_on_values() {
        let record = Record::mismatched(b"key".to_vec());
        assert!(!record.matches());
        assert_eq!(record.key(), b"key");
        assert!(record.values(&[]).is_err());
    }

    #[test]
    fn matched_record_decodes_values() {
        let stake = Stake64;
        let data = Data;
        let encoded_stake = stake.encode(&FieldValue::U64(66));
        let encoded_data = data.encode(&FieldValue::Bytes(b"mydata".to_vec()));

        let record = Record::matched(b"mykey".to_vec(), vec![encoded_stake, encoded_data]);
        let fields: Vec<Box<dyn Field>> = vec![Box::new(stake), Box::new(data)];

        let values = record.values(&fields).unwrap();
        assert_eq!(values[0], FieldValue::U64(66));
        assert_eq!(values[1], FieldValue::Bytes(b"mydata".to_vec()));
    }

    #[test]
    fn wrong_arity_errors() {
        let record = Record::matched(b"mykey".to_vec(), vec![vec![1, 2, 3]]);
        let fields: Vec<Box<dyn Field>> = vec![Box::new(Stake64), Box::new(Data)];
        assert!(record.values(&fields).is_err());
    }
}
