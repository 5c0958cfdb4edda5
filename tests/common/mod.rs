pub mod mock_api;

use std::io::Write;
use tempfile::NamedTempFile;
use wabulk::config::Config;

/// Config with complete credentials for tests
pub fn test_config() -> Config {
    Config {
        api_token: "test-token".to_string(),
        phone_number_id: "1000".to_string(),
        waba_id: "2000".to_string(),
        ..Config::default()
    }
}

/// CSV with a `Phone` column holding 1555000001..=n
pub fn contacts_csv(n: usize) -> String {
    let mut csv = String::from("Name,Phone\n");
    for i in 1..=n {
        csv.push_str(&format!("Contact {},1555{:06}\n", i, i));
    }
    csv
}

/// Write a CSV to a temp file that lives as long as the handle
pub fn contacts_file(n: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contacts_csv(n).as_bytes())
        .expect("Failed to write csv");
    file
}
