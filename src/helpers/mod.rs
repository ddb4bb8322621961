pub mod pagination_helpers;

#[cfg(test)]
pub mod test_server;
