#[cfg(test)]
mod transaction_tests;
