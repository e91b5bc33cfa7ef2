mod partial_failure;
