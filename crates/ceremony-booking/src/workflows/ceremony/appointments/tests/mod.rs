mod common;
mod concurrency;
