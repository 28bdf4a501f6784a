pub mod admin_controller;
pub mod contact_controller;
pub mod health_controller;

#[cfg(test)]
pub(crate) mod test_support;
