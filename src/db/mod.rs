pub mod padstore;
