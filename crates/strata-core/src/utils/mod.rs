pub mod fs;

#[cfg(test)]
mod tests;
