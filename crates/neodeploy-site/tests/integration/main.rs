//! Integration tests for neodeploy-site
//!
//! Uses wiremock to simulate the site hosting API and verifies
//! end-to-end behavior of the SiteClient: listing, info, key retrieval,
//! uploads, deletes and error mapping.

mod common;

mod test_info_key;
mod test_list;
mod test_upload_delete;
