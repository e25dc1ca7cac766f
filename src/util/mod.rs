pub mod debug_dump;
