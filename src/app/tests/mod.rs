mod support;

mod run_loop;
