mod topology_roundtrip_tests;
