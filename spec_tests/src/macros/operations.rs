/// Runs the `operations/block_header` suite of the unpacked consensus-spec-tests
/// corpus for one preset and fork against the client transition.
///
/// The corpus is read from `CONSENSUS_SPEC_TESTS_DIR`, falling back to
/// `consensus-spec-tests` inside the calling crate. A missing corpus skips the test.
#[macro_export]
macro_rules! test_block_header {
    ($preset:ident, $fork:ident) => {
        $crate::paste::paste! {
            #[allow(non_snake_case)]
            mod [<block_header_ $preset:snake _ $fork>] {
                #[test]
                fn test_block_header() {
                    let corpus = $crate::FilesystemCorpus::from_env(concat!(
                        env!("CARGO_MANIFEST_DIR"),
                        "/consensus-spec-tests"
                    ));
                    if !corpus.root().is_dir() {
                        println!(
                            "skipping block_header tests: no corpus at {}",
                            corpus.root().display()
                        );
                        return;
                    }

                    let mut context = chain::PresetContext::new();
                    let report = $crate::SuiteDriver::<containers::$preset>::new(
                        corpus,
                        $crate::ClientTransition,
                    )
                    .parallel(true)
                    .run_all(chain::ForkName::[<$fork:camel>], &mut context)
                    .expect("block_header suite aborted");

                    println!("{report}");
                    report.assert_all_passed();
                }
            }
        }
    };
}
