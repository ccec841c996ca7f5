#![cfg(feature = "spec_tests")]

use spec_tests::test_block_header;

test_block_header!(MinimalPreset, bellatrix);
test_block_header!(MinimalPreset, capella);
test_block_header!(MinimalPreset, deneb);

test_block_header!(MainnetPreset, bellatrix);
test_block_header!(MainnetPreset, capella);
test_block_header!(MainnetPreset, deneb);
