pub mod mimc;
