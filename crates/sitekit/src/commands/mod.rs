pub mod init;
pub mod qr;
pub mod sitemap;
