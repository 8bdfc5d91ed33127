pub mod i2c;
