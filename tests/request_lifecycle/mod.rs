mod progressive_results;
mod request_states;
