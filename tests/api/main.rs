mod admin;
mod health_check;
mod helpers;
mod quota;
mod registration;
