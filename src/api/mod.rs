pub mod leave_request;
pub mod pass;
pub mod report;

#[cfg(test)]
mod tests;
