//! End-to-end tests of the `bookalope` client against `bookalope-testnet`.

#[cfg(test)]
mod tests;
