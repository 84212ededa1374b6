mod support;

mod app {
    mod runtime_tests;
}

mod domain {
    mod presets_tests;
}

mod form {
    mod autosave_tests;
    mod session_tests;
    mod validation_tests;
}

mod submit {
    mod pipeline_tests;
}
