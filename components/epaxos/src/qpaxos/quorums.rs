/// quorum returns the size of a simple majority of `n` replicas.
pub fn quorum(n: i32) -> i32 {
    n / 2 + 1
}

/// fast_quorum returns the number of attribute-identical replies, besides the leader itself,
/// a PreAccept needs to commit in one round trip.
/// Up to `n/2` replicas can be silent while the fast path still completes.
pub fn fast_quorum(n: i32) -> i32 {
    let fq = n - n / 2;
    // a single replica cluster has no peer to reply.
    std::cmp::min(fq, std::cmp::max(n - 1, 0))
}
