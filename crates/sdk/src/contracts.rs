//! Contract interfaces used by ENS lookups.

use alloy_sol_types::sol;

sol! {
    /// ENS registry.
    contract EnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    /// Profile functions of the public resolver.
    contract PublicResolver {
        function addr(bytes32 node) external view returns (address);
        function text(bytes32 node, string key) external view returns (string);
        function name(bytes32 node) external view returns (string);
    }

    /// ENSIP-10 wildcard resolution.
    contract ExtendedResolver {
        function supportsInterface(bytes4 interfaceID) external view returns (bool);
        function resolve(bytes name, bytes data) external view returns (bytes);
    }

    /// ERC-721 metadata extension.
    contract Erc721 {
        function tokenURI(uint256 tokenId) external view returns (string);
    }

    /// ERC-1155 metadata URI extension.
    contract Erc1155 {
        function uri(uint256 id) external view returns (string);
    }

    /// ERC-3668 revert asking the caller to fetch the answer from a gateway.
    error OffchainLookup(address sender, string[] urls, bytes callData, bytes4 callbackFunction, bytes extraData);

    /// Argument layout of an ERC-3668 callback; the selector is replaced by
    /// the one named in the revert.
    function ccipCallback(bytes response, bytes extraData) external view returns (bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{SolCall, SolError};

    #[test]
    fn selectors_match_deployed_interfaces() {
        assert_eq!(PublicResolver::addrCall::SELECTOR, [0x3b, 0x3b, 0x57, 0xde]);
        assert_eq!(
            ExtendedResolver::supportsInterfaceCall::SELECTOR,
            [0x01, 0xff, 0xc9, 0xa7]
        );
        assert_eq!(ExtendedResolver::resolveCall::SELECTOR, [0x90, 0x61, 0xb9, 0x23]);
        assert_eq!(OffchainLookup::SELECTOR, [0x55, 0x6f, 0x18, 0x30]);
    }
}
