#![cfg(test)]

mod integration;
