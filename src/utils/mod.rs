pub mod startup_utils;
