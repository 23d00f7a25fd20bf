mod helpers;
mod prune_tests;
