//! Canned results for benchmarks.
//!
//! Row-sets are generated from fixed seeds so every run sees the same data.
//! The first jet row is always the reference row used by the select
//! benchmarks: `1, 1, 1, "test", NULL, "test", "test", "{5}", "{3}"`.

use boilbench_mimic::{ExecResult, QueryResult, Value};
use boilbench_models::Jet;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Columns of the `jets` table, in table order.
pub const JET_COLUMNS: [&str; 9] = [
    "id",
    "pilot_id",
    "airport_id",
    "name",
    "color",
    "uuid",
    "identifier",
    "cargo",
    "manifest",
];

/// Columns read by the subset and complex selects.
pub const JET_SUBSET_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "color",
    "uuid",
    "identifier",
    "cargo",
    "manifest",
];

pub const AIRPORT_COLUMNS: [&str; 2] = ["id", "size"];

/// DSN used by the DSN-keyed insert benchmark.
pub const INSERT_DSN: &str = "postgres://BenchmarkPOPInsert";

/// Number of rows in a generated row-set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scale {
    /// The reference row only.
    Single,
    Small,
    Medium,
    Large,
}

impl Scale {
    pub const ALL: [Scale; 4] = [Scale::Single, Scale::Small, Scale::Medium, Scale::Large];

    /// Get the row count for this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Single => 1,
            Scale::Small => 10,
            Scale::Medium => 100,
            Scale::Large => 1_000,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Single
    }
}

/// Generate a random string of specified length.
fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Hex-encoded random 16 bytes.
fn random_uuid(rng: &mut StdRng) -> String {
    let mut id = [0u8; 16];
    rng.fill(&mut id);
    hex::encode(id)
}

/// The reference jet row.
pub fn sample_jet_row() -> Vec<Value> {
    vec![
        Value::Int64(1),
        Value::Int64(1),
        Value::Int64(1),
        Value::from("test"),
        Value::Null,
        Value::from("test"),
        Value::from("test"),
        Value::Bytes(b"{5}".to_vec()),
        Value::Bytes(b"{3}".to_vec()),
    ]
}

/// Generate `count` full jet rows.
pub fn generate_jet_rows(count: usize) -> Vec<Vec<Value>> {
    const SEED: u64 = 12345;
    let mut rng = StdRng::seed_from_u64(SEED);
    let colors = ["red", "green", "blue", "white"];

    (0..count)
        .map(|i| {
            if i == 0 {
                return sample_jet_row();
            }
            let color = if rng.gen_bool(0.5) {
                Value::from(colors[i % colors.len()])
            } else {
                Value::Null
            };
            vec![
                Value::Int64(i as i64 + 1),
                Value::Int64(rng.gen_range(1..=100)),
                Value::Int64(rng.gen_range(1..=10)),
                Value::from(format!("jet_{}", i)),
                color,
                Value::from(random_uuid(&mut rng)),
                Value::from(random_string(&mut rng, 8)),
                Value::Bytes(format!("{{{}}}", rng.gen_range(0..10)).into_bytes()),
                Value::Bytes(format!("{{{}}}", rng.gen_range(0..10)).into_bytes()),
            ]
        })
        .collect()
}

/// Project full jet rows onto [`JET_SUBSET_COLUMNS`].
fn subset(row: Vec<Value>) -> Vec<Value> {
    row.into_iter()
        .zip(JET_COLUMNS)
        .filter(|(_, col)| JET_SUBSET_COLUMNS.contains(col))
        .map(|(value, _)| value)
        .collect()
}

/// Full-width jet row-set.
pub fn jet_query(scale: Scale) -> QueryResult {
    QueryResult::new(JET_COLUMNS)
        .with_rows(generate_jet_rows(scale.count()))
        .any_input()
}

/// Jet row-set with only the subset columns.
pub fn jet_query_subset(scale: Scale) -> QueryResult {
    let rows = generate_jet_rows(scale.count())
        .into_iter()
        .map(subset)
        .collect();
    QueryResult::new(JET_SUBSET_COLUMNS)
        .with_rows(rows)
        .any_input()
}

/// Result for inserts that return nothing.
pub fn jet_exec() -> ExecResult {
    ExecResult::new(1).any_input()
}

/// Row-set for inserts that read the generated id back.
pub fn jet_insert_returning() -> QueryResult {
    QueryResult::new(["id"])
        .with_row(vec![Value::Int64(1)])
        .any_input()
}

/// Airport row-set; every third airport has no size.
pub fn airport_query(scale: Scale) -> QueryResult {
    const SEED: u64 = 54321;
    let mut rng = StdRng::seed_from_u64(SEED);

    let rows = (0..scale.count())
        .map(|i| {
            let size = if i % 3 == 2 {
                Value::Null
            } else {
                Value::Int64(rng.gen_range(1..=50))
            };
            vec![Value::Int64(i as i64 + 1), size]
        })
        .collect();
    QueryResult::new(AIRPORT_COLUMNS)
        .with_rows(rows)
        .any_input()
}

/// The jet inserted by the insert benchmarks.
///
/// The id is set, so inferred inserts write every column and need no
/// `RETURNING`.
pub fn sample_jet() -> Jet {
    Jet {
        id: 1,
        pilot_id: 1,
        airport_id: 1,
        name: "test".into(),
        color: None,
        uuid: "test".into(),
        identifier: "test".into(),
        cargo: b"{5}".to_vec(),
        manifest: b"{3}".to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_counts() {
        assert_eq!(Scale::Single.count(), 1);
        assert_eq!(Scale::Small.count(), 10);
        assert_eq!(Scale::Medium.count(), 100);
        assert_eq!(Scale::Large.count(), 1_000);
    }

    #[test]
    fn test_generate_jet_rows() {
        let rows = generate_jet_rows(50);
        assert_eq!(rows.len(), 50);
        assert_eq!(rows[0], sample_jet_row());
        assert!(rows.iter().all(|r| r.len() == JET_COLUMNS.len()));

        // Check deterministic generation
        assert_eq!(rows, generate_jet_rows(50));
    }

    #[test]
    fn test_subset_projection() {
        let query = jet_query_subset(Scale::Small);
        assert_eq!(query.columns(), JET_SUBSET_COLUMNS);
        assert_eq!(query.len(), 10);

        let first = &query.rows()[0];
        assert_eq!(first[0], Value::Int64(1));
        assert_eq!(first[1], Value::from("test"));
        assert_eq!(first[2], Value::Null);
    }

    #[test]
    fn test_results_accept_any_input() {
        assert_eq!(jet_query(Scale::Single).num_input, None);
        assert_eq!(jet_exec().num_input, None);
        assert_eq!(jet_exec().rows_affected(), 1);
        assert_eq!(jet_insert_returning().len(), 1);
    }

    #[test]
    fn test_airport_query() {
        let query = airport_query(Scale::Small);
        assert_eq!(query.len(), 10);
        assert_eq!(query.rows()[2][1], Value::Null);
    }
}
