pub mod csv_table;
pub mod http_client;

pub use http_client::TnrsClient;
