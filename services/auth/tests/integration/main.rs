
mod account_test;
mod otp_verify_test;
