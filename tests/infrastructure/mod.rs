mod memory_job_store_test;
mod signature_verifier_test;
