pub mod backoff;

#[cfg(test)]
mod backoff_test;
