pub mod db;
pub mod sender;
