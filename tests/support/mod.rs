pub mod fake_vault;
