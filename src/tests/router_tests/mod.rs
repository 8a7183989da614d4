mod analyze_tests;
mod economics_tests;
mod health_tests;
mod listings_tests;
