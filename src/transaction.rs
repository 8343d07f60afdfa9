pub mod transaction;
pub mod history;

#[cfg(test)]
mod test;
